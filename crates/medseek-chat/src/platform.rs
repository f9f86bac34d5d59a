//! Platform checks behind the iOS Safari viewport fixes.

/// Height change (in CSS pixels) treated as the on-screen keyboard
pub const KEYBOARD_THRESHOLD_PX: i32 = 50;

/// Font size that stops iOS from zooming into focused inputs
pub const NO_ZOOM_FONT_SIZE: &str = "16px";

pub fn is_ios(user_agent: &str) -> bool {
    ["iPad", "iPhone", "iPod"]
        .iter()
        .any(|device| user_agent.contains(device))
}

/// iOS Safari proper; Chrome (`CriOS`) and Firefox (`FxiOS`) on iOS are excluded
pub fn is_ios_safari(user_agent: &str) -> bool {
    is_ios(user_agent) && !user_agent.contains("CriOS") && !user_agent.contains("FxiOS")
}

/// Value for the `--vh` custom property: one percent of the window height
pub fn viewport_unit(inner_height: f64) -> String {
    format!("{}px", inner_height * 0.01)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardEvent {
    /// Keyboard appeared, covering this many pixels
    Show(i32),
    Hide,
}

impl KeyboardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            KeyboardEvent::Show(_) => "show",
            KeyboardEvent::Hide => "hide",
        }
    }

    pub fn height(&self) -> i32 {
        match self {
            KeyboardEvent::Show(height) => *height,
            KeyboardEvent::Hide => 0,
        }
    }
}

/// Infers keyboard show/hide from successive window heights
#[derive(Debug, Clone)]
pub struct KeyboardTracker {
    last_height: i32,
}

impl KeyboardTracker {
    pub fn new(initial_height: i32) -> Self {
        Self {
            last_height: initial_height,
        }
    }

    /// Record a resize. Small changes only move the baseline.
    pub fn observe(&mut self, height: i32) -> Option<KeyboardEvent> {
        let shrink = self.last_height - height;
        self.last_height = height;

        if shrink > KEYBOARD_THRESHOLD_PX {
            Some(KeyboardEvent::Show(shrink))
        } else if shrink < -KEYBOARD_THRESHOLD_PX {
            Some(KeyboardEvent::Hide)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFARI: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const CHROME_IOS: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/118.0 Mobile/15E148 Safari/604.1";
    const FIREFOX_IOS: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) FxiOS/119.0 Mobile/15E148 Safari/605.1.15";
    const DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    #[test]
    fn test_ios_detection() {
        assert!(is_ios(SAFARI));
        assert!(is_ios(CHROME_IOS));
        assert!(is_ios(FIREFOX_IOS));
        assert!(!is_ios(DESKTOP));
    }

    #[test]
    fn test_ios_safari_excludes_in_app_browsers() {
        assert!(is_ios_safari(SAFARI));
        assert!(!is_ios_safari(CHROME_IOS));
        assert!(!is_ios_safari(FIREFOX_IOS));
        assert!(!is_ios_safari(DESKTOP));
    }

    #[test]
    fn test_keyboard_show_and_hide() {
        let mut tracker = KeyboardTracker::new(800);
        assert_eq!(tracker.observe(500), Some(KeyboardEvent::Show(300)));
        assert_eq!(tracker.observe(800), Some(KeyboardEvent::Hide));
    }

    #[test]
    fn test_small_resizes_move_baseline() {
        let mut tracker = KeyboardTracker::new(800);
        assert_eq!(tracker.observe(770), None);
        assert_eq!(tracker.observe(740), None);
        assert_eq!(tracker.observe(740), None);
        // 60px from the current baseline, not from the initial height
        assert_eq!(tracker.observe(680), Some(KeyboardEvent::Show(60)));
    }

    #[test]
    fn test_event_payload() {
        assert_eq!(KeyboardEvent::Show(320).name(), "show");
        assert_eq!(KeyboardEvent::Show(320).height(), 320);
        assert_eq!(KeyboardEvent::Hide.height(), 0);
    }

    #[test]
    fn test_viewport_unit() {
        assert_eq!(viewport_unit(800.0), "8px");
        assert_eq!(viewport_unit(667.0), "6.67px");
    }
}
