use super::*;
use std::collections::HashMap;

/// Maps raw keys to a player and a slot.
///
/// Each row of keys belongs to one player, in order; the n-th key of a row
/// presses slot n. Keys are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap(HashMap<char, (AgentId, Slot)>);

impl Keymap {
    pub fn new<S: AsRef<str>>(rows: &[S]) -> Self {
        Self(
            rows.iter()
                .enumerate()
                .flat_map(|(agent, row)| {
                    row.as_ref()
                        .chars()
                        .enumerate()
                        .map(move |(slot, key)| (key.to_ascii_lowercase(), (agent, slot)))
                        .collect::<Vec<(char, (AgentId, Slot))>>()
                })
                .collect(),
        )
    }
    pub fn resolve(&self, key: char) -> Option<(AgentId, Slot)> {
        self.0.get(&key.to_ascii_lowercase()).copied()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Keymap {
    /// Two players on one keyboard, left and right hands, a 3x4 block each.
    fn default() -> Self {
        Self::new(&["qwerasdfzxcv", "uiopjkl;m,./"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let keymap = Keymap::default();
        assert_eq!(keymap.len(), 24);
        assert_eq!(keymap.resolve('q'), Some((0, 0)));
        assert_eq!(keymap.resolve('v'), Some((0, 11)));
        assert_eq!(keymap.resolve('u'), Some((1, 0)));
        assert_eq!(keymap.resolve(';'), Some((1, 7)));
        assert_eq!(keymap.resolve('/'), Some((1, 11)));
    }
    #[test]
    fn case_insensitive() {
        let keymap = Keymap::default();
        assert_eq!(keymap.resolve('Q'), keymap.resolve('q'));
    }
    #[test]
    fn unknown_keys() {
        let keymap = Keymap::default();
        assert_eq!(keymap.resolve('1'), None);
        assert_eq!(keymap.resolve(' '), None);
    }
    #[test]
    fn custom_rows() {
        let keymap = Keymap::new(&["ab".to_string(), "cd".to_string(), "ef".to_string()]);
        assert_eq!(keymap.resolve('f'), Some((2, 1)));
        assert!(Keymap::new::<&str>(&[]).is_empty());
    }
}
