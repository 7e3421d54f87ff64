// Yes/no confirmation prompts

/// Something that can ask the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

/// A fixed answer, e.g. from a `--yes` flag
impl Confirm for bool {
    fn confirm(&mut self, _message: &str) -> bool {
        *self
    }
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_confirm() {
        assert!(true.confirm("sure?"));
        assert!(!false.confirm("sure?"));
    }

    #[test]
    fn test_closure_confirm_sees_message() {
        let mut seen = Vec::new();
        let mut prompt = |msg: &str| {
            seen.push(msg.to_string());
            false
        };
        assert!(!prompt.confirm("Delete everything?"));
        assert_eq!(seen, vec!["Delete everything?".to_string()]);
    }
}
