//! The floating-window desktop: an in-memory registry of window
//! descriptors with focus raising, a drag lifecycle and a responsive
//! relayout. Every transition is a total function over the registry,
//! so no invalid state is reachable.

use serde::{Deserialize, Serialize};

/// The auth overlay renders above everything whenever visible,
/// regardless of focus.
pub const AUTH_WINDOW: &str = "auth";

pub const TABLET_MIN: u32 = 768;
pub const DESKTOP_MIN: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

impl Breakpoint {
    pub fn for_width(width: u32) -> Self {
        if width < TABLET_MIN {
            Self::Mobile
        } else if width < DESKTOP_MIN {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }
}

/// Window geometry. Coordinates are signed: dragging a window off the
/// viewport is allowed and not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowDescriptor {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub rect: Rect,
    pub visible: bool,
    pub focused: bool,
}

#[derive(Debug, Clone)]
struct Window {
    id: &'static str,
    title: &'static str,
    rect: Rect,
    visible: bool,
}

#[derive(Debug, Clone)]
struct DragState {
    id: String,
    // pointer offset from the window origin at grab time
    grab_dx: i32,
    grab_dy: i32,
}

#[derive(Debug)]
pub struct WindowManager {
    windows: Vec<Window>,
    focused: Option<String>,
    drag: Option<DragState>,
    viewport: (u32, u32),
}

impl WindowManager {
    pub fn new(viewport_w: u32, viewport_h: u32) -> Self {
        let mut manager = Self {
            windows: vec![
                Window::seed("terminal", "NETWORK SCANNER"),
                Window::seed("dashboard", "DASHBOARD"),
                Window::seed("files", "FILE STORAGE"),
                Window::seed("notifications", "NOTIFICATION CENTER"),
                Window::seed(AUTH_WINDOW, "SECURE LOGIN"),
            ],
            focused: None,
            drag: None,
            viewport: (viewport_w, viewport_h),
        };
        manager.relayout(viewport_w, viewport_h);
        manager
    }

    pub fn breakpoint(&self) -> Breakpoint {
        Breakpoint::for_width(self.viewport.0)
    }

    /// Marks `id` topmost. Unknown ids are ignored.
    pub fn focus(&mut self, id: &str) {
        if self.windows.iter().any(|w| w.id == id) {
            self.focused = Some(id.to_string());
        }
    }

    pub fn start_drag(&mut self, id: &str, pointer_x: i32, pointer_y: i32) {
        let Some(window) = self.windows.iter().find(|w| w.id == id) else {
            return;
        };
        self.drag = Some(DragState {
            id: id.to_string(),
            grab_dx: pointer_x - window.rect.x,
            grab_dy: pointer_y - window.rect.y,
        });
        self.focus(id);
    }

    pub fn move_drag(&mut self, pointer_x: i32, pointer_y: i32) {
        let Some(drag) = self.drag.clone() else {
            return;
        };
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == drag.id) {
            window.rect.x = pointer_x - drag.grab_dx;
            window.rect.y = pointer_y - drag.grab_dy;
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn close(&mut self, id: &str) {
        self.hide(id);
    }

    /// No distinct minimized state is tracked; minimize and close are
    /// observationally identical.
    pub fn minimize(&mut self, id: &str) {
        self.hide(id);
    }

    fn hide(&mut self, id: &str) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
            window.visible = false;
        }
    }

    /// Recomputes every window rectangle for the viewport. Identity and
    /// visibility are stable across breakpoint changes, only geometry
    /// moves. The auth overlay is centered at every breakpoint.
    pub fn relayout(&mut self, viewport_w: u32, viewport_h: u32) {
        self.viewport = (viewport_w, viewport_h);
        let breakpoint = Breakpoint::for_width(viewport_w);

        let mut slot = 0usize;
        for i in 0..self.windows.len() {
            if self.windows[i].id == AUTH_WINDOW {
                self.windows[i].rect = centered_rect(viewport_w, viewport_h, 420, 280);
            } else {
                self.windows[i].rect = grid_rect(breakpoint, viewport_w, slot);
                slot += 1;
            }
        }
    }

    /// Descriptors bottom-to-top: seed order, then the focused window,
    /// then the auth overlay whenever it is visible.
    pub fn descriptors(&self) -> Vec<WindowDescriptor> {
        let mut ordered: Vec<&Window> = Vec::with_capacity(self.windows.len());
        for window in &self.windows {
            if window.id != AUTH_WINDOW && !self.is_focused(window.id) {
                ordered.push(window);
            }
        }
        if let Some(focused) = self
            .windows
            .iter()
            .find(|w| w.id != AUTH_WINDOW && self.is_focused(w.id))
        {
            ordered.push(focused);
        }
        if let Some(auth) = self.windows.iter().find(|w| w.id == AUTH_WINDOW) {
            if auth.visible {
                ordered.push(auth);
            }
        }

        ordered
            .into_iter()
            .map(|w| WindowDescriptor {
                id: w.id.to_string(),
                title: w.title.to_string(),
                rect: w.rect,
                visible: w.visible,
                focused: self.is_focused(w.id),
            })
            .collect()
    }

    pub fn visible_ids(&self) -> Vec<String> {
        self.windows
            .iter()
            .filter(|w| w.visible)
            .map(|w| w.id.to_string())
            .collect()
    }

    fn is_focused(&self, id: &str) -> bool {
        self.focused.as_deref() == Some(id)
    }
}

impl Window {
    fn seed(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            rect: Rect {
                x: 0,
                y: 0,
                w: 0,
                h: 0,
            },
            visible: true,
        }
    }
}

fn centered_rect(viewport_w: u32, viewport_h: u32, w: u32, h: u32) -> Rect {
    Rect {
        x: (viewport_w as i32 - w as i32) / 2,
        y: (viewport_h as i32 - h as i32) / 2,
        w,
        h,
    }
}

fn grid_rect(breakpoint: Breakpoint, viewport_w: u32, slot: usize) -> Rect {
    let (cols, gap, h) = match breakpoint {
        Breakpoint::Mobile => (1u32, 8i32, 240u32),
        Breakpoint::Tablet => (2, 16, 320),
        Breakpoint::Desktop => (3, 24, 380),
    };
    let total_gap = gap as u32 * (cols + 1);
    let w = viewport_w.saturating_sub(total_gap) / cols;
    let col = (slot as u32) % cols;
    let row = (slot as u32) / cols;
    Rect {
        x: gap + col as i32 * (w as i32 + gap),
        y: gap + row as i32 * (h as i32 + gap),
        w,
        h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> WindowManager {
        WindowManager::new(1400, 900)
    }

    #[test]
    fn close_and_minimize_are_observationally_identical() {
        let mut closed = manager();
        let mut minimized = manager();
        closed.close("dashboard");
        minimized.minimize("dashboard");
        assert_eq!(closed.visible_ids(), minimized.visible_ids());
        assert!(!closed.visible_ids().contains(&"dashboard".to_string()));
    }

    #[test]
    fn focus_raises_the_window_below_the_auth_overlay() {
        let mut wm = manager();
        wm.focus("files");
        let order: Vec<String> = wm.descriptors().into_iter().map(|d| d.id).collect();
        assert_eq!(order.last().unwrap(), AUTH_WINDOW);
        assert_eq!(order[order.len() - 2], "files");
    }

    #[test]
    fn hidden_auth_overlay_gives_up_the_top_slot() {
        let mut wm = manager();
        wm.close(AUTH_WINDOW);
        wm.focus("terminal");
        let order: Vec<String> = wm.descriptors().into_iter().map(|d| d.id).collect();
        assert_eq!(order.last().unwrap(), "terminal");
        assert!(!order.contains(&AUTH_WINDOW.to_string()));
    }

    #[test]
    fn drag_moves_continuously_and_may_leave_the_viewport() {
        let mut wm = manager();
        let start = wm
            .descriptors()
            .into_iter()
            .find(|d| d.id == "terminal")
            .unwrap()
            .rect;

        wm.start_drag("terminal", start.x + 10, start.y + 10);
        wm.move_drag(start.x + 60, start.y + 30);
        let mid = wm
            .descriptors()
            .into_iter()
            .find(|d| d.id == "terminal")
            .unwrap()
            .rect;
        assert_eq!(mid.x, start.x + 50);
        assert_eq!(mid.y, start.y + 20);

        // off-screen is explicitly permitted
        wm.move_drag(-500, -500);
        wm.end_drag();
        let end = wm
            .descriptors()
            .into_iter()
            .find(|d| d.id == "terminal")
            .unwrap()
            .rect;
        assert!(end.x < 0 && end.y < 0);

        // after end_drag further moves are ignored
        wm.move_drag(0, 0);
        let after = wm
            .descriptors()
            .into_iter()
            .find(|d| d.id == "terminal")
            .unwrap()
            .rect;
        assert_eq!(after, end);
    }

    #[test]
    fn resize_to_mobile_changes_geometry_but_not_visibility() {
        let mut wm = manager();
        wm.close("notifications");
        let visible_before = wm.visible_ids();
        assert_eq!(wm.breakpoint(), Breakpoint::Desktop);

        wm.relayout(600, 900);
        assert_eq!(wm.breakpoint(), Breakpoint::Mobile);
        assert_eq!(wm.visible_ids(), visible_before);

        // mobile stacks everything in one column
        let xs: Vec<i32> = wm
            .descriptors()
            .into_iter()
            .filter(|d| d.id != AUTH_WINDOW)
            .map(|d| d.rect.x)
            .collect();
        assert!(xs.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn breakpoints_split_at_768_and_1200() {
        assert_eq!(Breakpoint::for_width(767), Breakpoint::Mobile);
        assert_eq!(Breakpoint::for_width(768), Breakpoint::Tablet);
        assert_eq!(Breakpoint::for_width(1199), Breakpoint::Tablet);
        assert_eq!(Breakpoint::for_width(1200), Breakpoint::Desktop);
    }

    #[test]
    fn layout_is_deterministic_for_a_given_viewport() {
        let a = WindowManager::new(1400, 900);
        let b = WindowManager::new(1400, 900);
        let rects_a: Vec<Rect> = a.descriptors().into_iter().map(|d| d.rect).collect();
        let rects_b: Vec<Rect> = b.descriptors().into_iter().map(|d| d.rect).collect();
        assert_eq!(rects_a, rects_b);
    }
}
