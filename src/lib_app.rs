use crate::lib_input::is_quit_key;
use crate::scene::Scene;
use crate::State;
use anyhow::Context;
use winit::{
    event::*,
    event_loop::EventLoop,
};

/// Open a window for `scene` and run the event loop until it is closed.
pub async fn run(scene: Scene) -> anyhow::Result<()> {
    // A host application may already have installed a logger
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    match serde_json::to_string_pretty(&scene.describe()) {
        Ok(description) => log::debug!("scene:\n{}", description),
        Err(e) => log::warn!("could not describe scene: {}", e),
    }

    let event_loop = EventLoop::new().context("failed to create the event loop")?;

    let window = winit::window::WindowBuilder::new()
        .with_title(scene.window.title.as_str())
        .with_inner_size(winit::dpi::PhysicalSize::new(scene.window.width, scene.window.height))
        .build(&event_loop)
        .context("failed to open a window")?;

    let mut state = State::new(&window, scene).await?;

    let mut last_render_time = instant::Instant::now();
    event_loop.run(move |event, control_flow| {
        match event {
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion{ delta, },
                ..
            } => {
                // Only counted while a drag button is held
                state.camera_controller.process_mouse(delta.0, delta.1)
            }
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == state.window().id() && !state.input(event) => {
                match event {
                    WindowEvent::CloseRequested => control_flow.exit(),
                    event if is_quit_key(event) => control_flow.exit(),
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        state.window().request_redraw();
                        let now = instant::Instant::now();
                        let dt = now - last_render_time;
                        last_render_time = now;

                        state.update(dt);
                        match state.render() {
                            Ok(_) => {}
                            // Reconfigure the surface if it's lost or outdated
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.resize(state.size),
                            Err(wgpu::SurfaceError::OutOfMemory | wgpu::SurfaceError::Other) => {
                                log::error!("surface out of memory; closing");
                                control_flow.exit()
                            }
                            Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout"),
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }).context("event loop terminated abnormally")?;

    Ok(())
}
