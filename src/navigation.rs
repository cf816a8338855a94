use std::sync::Mutex;

/// Surfaces the core may ask the front-end to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
}

/// Sink for navigation requests raised by the core.
pub trait Navigator: Send + Sync {
    fn request(&self, route: Route);
}

/// Buffers requests until the front-end drains them.
#[derive(Default)]
pub struct PendingNavigation {
    routes: Mutex<Vec<Route>>,
}

impl PendingNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every request made since the last drain, oldest first.
    pub fn drain(&self) -> Vec<Route> {
        self.routes
            .lock()
            .map(|mut routes| std::mem::take(&mut *routes))
            .unwrap_or_default()
    }
}

impl Navigator for PendingNavigation {
    fn request(&self, route: Route) {
        tracing::debug!(?route, "navigation requested");
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }
}
