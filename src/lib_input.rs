use crate::State;
use winit::{
    event::*,
    keyboard::{KeyCode, PhysicalKey},
};

/// Handle input events and update state accordingly.
/// Returns false for events the application loop should see (quit keys, resize).
pub fn handle_input(state: &mut State, event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(KeyCode::KeyR),
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } => {
            state.reset_view();
            true
        }
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(key),
                    state: key_state,
                    ..
                },
            ..
        } => state.camera_controller.process_keyboard(*key, *key_state),
        WindowEvent::MouseWheel { delta, .. } => {
            state.camera_controller.process_scroll(delta);
            true
        }
        WindowEvent::MouseInput {
            button,
            state: button_state,
            ..
        } => state.camera_controller.process_mouse_button(*button_state, *button),
        _ => false,
    }
}

/// Keys that close the window.
pub fn is_quit_key(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::KeyboardInput {
            event: KeyEvent {
                state: ElementState::Pressed,
                physical_key: PhysicalKey::Code(KeyCode::Escape | KeyCode::KeyQ),
                ..
            },
            ..
        }
    )
}
