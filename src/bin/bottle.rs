use lathe_viewer::demo_geometries;

fn main() -> anyhow::Result<()> {
    let scene = demo_geometries::bottle_scene()?;
    pollster::block_on(lathe_viewer::run(scene))
}
