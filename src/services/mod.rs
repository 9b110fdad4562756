// Web Portals services
// Services coordinate the native shell: screen sharing, window visibility, DevTools,
// settings, window geometry and the single-instance lock.

pub mod devtools;
pub mod screen_share;
pub mod settings_engine;
pub mod single_instance;
pub mod visibility;
pub mod window_state;
