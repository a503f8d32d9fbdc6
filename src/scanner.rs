//! Discovery of eligible windows.

use crate::drivers::WindowSystem;
use crate::error::WindowError;
use crate::physics::Body;

/// Whether `title` contains any of `whitelist`, ignoring case.
pub fn title_matches(title: &str, whitelist: &[&str]) -> bool {
    let title = title.to_lowercase();
    whitelist
        .iter()
        .any(|needle| title.contains(&needle.to_lowercase()))
}

/// Build a fresh body, at rest, for every visible whitelisted window.
///
/// Windows whose rectangle cannot be read are left out of this epoch; only a
/// failing enumeration is an error.
pub fn scan<S>(system: &mut S, whitelist: &[&str]) -> Result<Vec<Body<S::Handle>>, WindowError>
where
    S: WindowSystem + ?Sized,
{
    let mut bodies = Vec::new();
    for handle in system.enumerate_windows()? {
        if !system.is_visible(handle) {
            continue;
        }
        let title = system.title(handle);
        let title = title.trim();
        if title.is_empty() || !title_matches(title, whitelist) {
            continue;
        }
        match system.rect(handle) {
            Ok(rect) => bodies.push(Body::new(handle, title, rect)),
            Err(err) => {
                tracing::debug!(window = ?handle, title, %err, "skipping window without a rectangle");
            }
        }
    }
    if bodies.is_empty() {
        tracing::info!("scan: no matching windows found");
    } else {
        tracing::info!(count = bodies.len(), "scan: matching windows");
    }
    Ok(bodies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::memory::MemoryDesktop;
    use crate::geometry::Rect;

    const WHITELIST: &[&str] = &["Notepad", "Paint"];

    #[test]
    fn matching_ignores_case() {
        assert!(title_matches("untitled - NOTEPAD", WHITELIST));
        assert!(title_matches("mspaint", WHITELIST));
        assert!(!title_matches("Calculator", WHITELIST));
        assert!(!title_matches("", WHITELIST));
    }

    #[test]
    fn keeps_only_visible_titled_whitelisted_windows() {
        let desktop = MemoryDesktop::new(Rect::new(0, 0, 1920, 1080));
        let rect = Rect::from_origin_size(10, 10, 300, 200);
        let notepad = desktop.add_window("  Untitled - Notepad  ", rect);
        let hidden = desktop.add_window("Paint", rect);
        desktop.set_visible(hidden, false);
        desktop.add_window("   ", rect);
        desktop.add_window("Terminal", rect);
        let broken = desktop.add_window("Paint 2", rect);
        desktop.set_rect_fails(broken, true);

        let mut system = desktop.clone();
        let bodies = scan(&mut system, WHITELIST).unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].handle, notepad);
        assert_eq!(bodies[0].title, "Untitled - Notepad");
        assert_eq!((bodies[0].x, bodies[0].y), (10.0, 10.0));
        assert_eq!((bodies[0].width, bodies[0].height), (300.0, 200.0));
    }

    #[test]
    fn enumeration_failure_is_an_error() {
        let desktop = MemoryDesktop::new(Rect::new(0, 0, 100, 100));
        desktop.set_enumerate_fails(true);
        let mut system = desktop.clone();
        assert!(scan(&mut system, WHITELIST).is_err());
    }

    #[test]
    fn empty_desktop_yields_no_bodies() {
        let mut system = MemoryDesktop::new(Rect::new(0, 0, 100, 100));
        assert!(scan(&mut system, WHITELIST).unwrap().is_empty());
    }
}
