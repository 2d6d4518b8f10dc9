/// A `<select>` choice with its selection state resolved ahead of rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn list<S: AsRef<str>>(values: &[S], current: &str) -> Vec<SelectOption> {
        values
            .iter()
            .map(|v| SelectOption {
                value: v.as_ref().to_string(),
                selected: v.as_ref() == current,
            })
            .collect()
    }
}

/// A named filter drop-down on the listing page.
#[derive(Clone, Debug)]
pub struct FilterSelect {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<SelectOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_only_current_value() {
        let opts = SelectOption::list(&["Monday", "Friday"], "Friday");
        assert!(!opts[0].selected);
        assert!(opts[1].selected);
    }
}
