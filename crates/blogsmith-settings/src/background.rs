//! Site background: a home image that crossfades into the global image as
//! the visitor scrolls or leaves the home page

use std::time::{Duration, Instant};

use crate::schema::Background;

/// One image layer with its opacity per colour scheme
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub url: String,
    pub light_opacity: f64,
    pub dark_opacity: f64,
    pub transition: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneStyle {
    pub home: Option<Layer>,
    pub global: Option<Layer>,
    /// Overlay that blends the image into the page edges
    pub gradient: String,
    pub base_color: String,
    pub backdrop_filter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BackgroundScene {
    config: Background,
    on_home: bool,
    /// 0 shows the home image, 1 the global image
    scroll_ratio: f64,
    blend: f64,
    transition_started: Option<Instant>,
}

pub fn is_home_path(path: &str) -> bool {
    path.is_empty() || path == "/"
}

impl BackgroundScene {
    pub fn new(config: Background, path: &str) -> Self {
        let on_home = is_home_path(path);
        Self {
            config,
            on_home,
            scroll_ratio: 0.0,
            blend: if on_home { 0.0 } else { 1.0 },
            transition_started: None,
        }
    }

    pub fn on_home(&self) -> bool {
        self.on_home
    }

    pub fn scroll_ratio(&self) -> f64 {
        self.scroll_ratio
    }

    /// Follow a route change, starting a crossfade when it enters or leaves
    /// the home page
    pub fn navigate(&mut self, path: &str, now: Instant) {
        let on_home = is_home_path(path);
        if on_home == self.on_home {
            return;
        }

        self.on_home = on_home;
        self.transition_started = Some(now);
        if on_home {
            self.scroll_ratio = 0.0;
        }
        self.blend = if on_home { 0.0 } else { 1.0 };
    }

    /// Scrolling only drives the crossfade on the home page
    pub fn scroll(&mut self, scroll_y: f64, viewport_height: f64) {
        if !self.on_home || self.config.home_image_url.is_empty() || viewport_height <= 0.0 {
            return;
        }
        self.scroll_ratio = (scroll_y / viewport_height).clamp(0.0, 1.0);
    }

    pub fn is_transitioning(&self, now: Instant) -> bool {
        let duration = Duration::from_millis(self.config.transition_duration);
        self.transition_started
            .is_some_and(|at| now.saturating_duration_since(at) < duration)
    }

    /// Layers and overlays to draw at `now`; `None` draws nothing
    pub fn render(&self, now: Instant) -> Option<SceneStyle> {
        let Background {
            image_url,
            home_image_url,
            opacity,
            dark_opacity,
            blur,
            overlay_opacity,
            enabled,
            transition_duration,
        } = &self.config;

        if !enabled || (image_url.is_empty() && home_image_url.is_empty()) {
            return None;
        }

        let transitioning = self.is_transitioning(now);
        let show_home = (self.on_home || transitioning) && !home_image_url.is_empty();
        let show_global = !image_url.is_empty();

        let (home_opacity, global_opacity) = if self.on_home && !transitioning {
            (1.0 - self.scroll_ratio, self.scroll_ratio)
        } else if transitioning {
            (1.0 - self.blend, self.blend)
        } else {
            (0.0, 1.0)
        };

        let transition = if transitioning {
            format!("opacity {transition_duration}ms ease")
        } else {
            "none".to_string()
        };
        let layer = |url: &str, layer_opacity: f64| Layer {
            url: url.to_string(),
            light_opacity: layer_opacity * (opacity / 100.0),
            dark_opacity: layer_opacity * (dark_opacity / 100.0),
            transition: transition.clone(),
        };

        let edge = overlay_opacity * 0.9 / 100.0;
        let middle = overlay_opacity * 0.5 / 100.0;
        Some(SceneStyle {
            home: show_home.then(|| layer(home_image_url.as_str(), home_opacity)),
            global: show_global.then(|| layer(image_url.as_str(), global_opacity)),
            gradient: format!(
                "linear-gradient(to top, hsl(var(--background) / {edge}), hsl(var(--background) / {middle}), hsl(var(--background) / {edge}))"
            ),
            base_color: format!("hsl(var(--background) / {})", overlay_opacity / 100.0),
            backdrop_filter: (*blur > 0.0).then(|| format!("blur({blur}px)")),
        })
    }
}
