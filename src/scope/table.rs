use super::scope::{LineTypes, Scope};

/// Read-only view of a file's declarations: for every line from 1 to the
/// last line, the type expression known for each name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineTypeTable {
    lines: Vec<LineTypes>,
}

impl LineTypeTable {
    /// Number of lines in the table; line numbers run from 1 to this.
    pub fn line_end(&self) -> u32 {
        self.lines.len() as u32
    }

    /// Everything known on `line`, or `None` outside the file.
    pub fn types_at(&self, line: u32) -> Option<&LineTypes> {
        if line == 0 {
            return None;
        }
        self.lines.get((line - 1) as usize)
    }

    /// The declared type expression of `name` on `line`.
    ///
    /// Names that were only assigned without an annotation have no type.
    pub fn get(&self, line: u32, name: &str) -> Option<&str> {
        self.types_at(line)?.get(name)?.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &LineTypes)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(index, types)| (index as u32 + 1, types))
    }
}

/// Merges a scope's own records with its descendants'. A child's line
/// replaces the parent's whole entry for that line.
fn merge(scope: &Scope) -> Vec<LineTypes> {
    let mut lines = scope.own_types();

    for child in &scope.children {
        for (offset, types) in merge(child).into_iter().enumerate() {
            let line = child.line_start + offset as u32;
            if line >= scope.line_start && line <= scope.line_end {
                lines[(line - scope.line_start) as usize] = types;
            }
        }
    }

    lines
}

/// Flattens the module scope into a table covering lines 1 to `line_end`.
pub fn flatten(root: &Scope) -> LineTypeTable {
    let mut lines = vec![LineTypes::new(); root.line_start.saturating_sub(1) as usize];
    lines.extend(merge(root));

    LineTypeTable { lines }
}
