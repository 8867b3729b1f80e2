use anyhow::Result;
use dialoguer::{Select, theme::ColorfulTheme};

/// Navigation vocabulary shared by every interactive menu
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nav {
    Refresh,
    Back,
    Exit,
}

/// Outcome of a menu prompt: either a value the caller registered or
/// one of the shared navigation entries.
#[derive(Debug, PartialEq, Eq)]
pub enum Choice<T> {
    Item(T),
    Nav(Nav),
}

/// A labeled menu over arbitrary values. Navigation entries render
/// after the items, always in refresh / back / exit order.
pub struct Menu<T> {
    title: String,
    entries: Vec<(String, T)>,
    refresh: bool,
    back: Option<String>,
    exit: bool,
}

impl<T> Menu<T> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
            refresh: false,
            back: None,
            exit: false,
        }
    }

    pub fn item(mut self, label: impl Into<String>, value: T) -> Self {
        self.entries.push((label.into(), value));
        self
    }

    pub fn items<I, L>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
    {
        for (label, value) in items {
            self.entries.push((label.into(), value));
        }
        self
    }

    pub fn with_refresh(mut self) -> Self {
        self.refresh = true;
        self
    }

    pub fn with_back(mut self, label: impl Into<String>) -> Self {
        self.back = Some(label.into());
        self
    }

    pub fn with_exit(mut self) -> Self {
        self.exit = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.iter().map(|(label, _)| label.clone()).collect();
        if self.refresh {
            labels.push("Refresh".to_string());
        }
        if let Some(back) = &self.back {
            labels.push(back.clone());
        }
        if self.exit {
            labels.push("Exit".to_string());
        }
        labels
    }

    /// Map a selected index back to the entry or navigation choice it labels
    fn resolve(&self, index: usize) -> Choice<&T> {
        if let Some((_, value)) = self.entries.get(index) {
            return Choice::Item(value);
        }
        let mut offset = index - self.entries.len();
        if self.refresh {
            if offset == 0 {
                return Choice::Nav(Nav::Refresh);
            }
            offset -= 1;
        }
        if self.back.is_some() && offset == 0 {
            return Choice::Nav(Nav::Back);
        }
        Choice::Nav(Nav::Exit)
    }

    /// Show the menu and block for a selection
    pub fn prompt(&self) -> Result<Choice<&T>> {
        let labels = self.labels();
        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(&self.title)
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(self.resolve(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_maps_items_in_order() {
        let menu = Menu::new("t").item("one", 1).item("two", 2);
        assert_eq!(menu.resolve(0), Choice::Item(&1));
        assert_eq!(menu.resolve(1), Choice::Item(&2));
    }

    #[test]
    fn test_resolve_nav_entries_after_items() {
        let menu = Menu::new("t")
            .item("one", 1)
            .with_refresh()
            .with_back("Back")
            .with_exit();
        assert_eq!(menu.resolve(1), Choice::Nav(Nav::Refresh));
        assert_eq!(menu.resolve(2), Choice::Nav(Nav::Back));
        assert_eq!(menu.resolve(3), Choice::Nav(Nav::Exit));
    }

    #[test]
    fn test_resolve_without_refresh() {
        let menu = Menu::new("t").item("one", 1).with_back("Back").with_exit();
        assert_eq!(menu.resolve(1), Choice::Nav(Nav::Back));
        assert_eq!(menu.resolve(2), Choice::Nav(Nav::Exit));
    }

    #[test]
    fn test_labels_include_nav_entries() {
        let menu = Menu::new("t")
            .item("one", 1)
            .with_refresh()
            .with_back("Back to list")
            .with_exit();
        assert_eq!(menu.labels(), vec!["one", "Refresh", "Back to list", "Exit"]);
    }

    #[test]
    fn test_items_builder_preserves_order() {
        let menu = Menu::new("t").items(vec![("a", 'a'), ("b", 'b'), ("c", 'c')]);
        assert_eq!(menu.resolve(2), Choice::Item(&'c'));
        assert!(!menu.is_empty());
    }
}
