//! Route-table fixtures for registry conformance (feature = `registry`).

use waypoint::{ActionRegistry, ActionRegistryBuilder};

use crate::ScreenBook;

/// A sample navigation table: a home screen plus a nested user section.
pub const SAMPLE_TABLE_JSON: &str = r#"{
    "routes": [
        { "path": "/home", "name": "home", "action": "show_home" },
        { "path": "/users", "children": [
            { "path": "/{id}", "name": "user_detail", "method": "PUSH", "action": "show_user" }
        ]}
    ]
}"#;

/// A registry whose actions render into `book` under their label.
#[must_use]
pub fn screen_registry(book: &ScreenBook) -> ActionRegistry {
    let show = |label: &'static str, book: ScreenBook| move || book.show(label);
    ActionRegistryBuilder::new()
        .action("show_home", show("home", book.clone()))
        .action("show_user", show("user", book.clone()))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_its_labels() {
        let registry = screen_registry(&ScreenBook::new());
        assert!(registry.contains("show_home"));
        assert!(registry.contains("show_user"));
        assert_eq!(registry.labels(), ["show_home", "show_user"]);
    }
}
