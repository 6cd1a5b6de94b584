use std::collections::HashMap;

/// Types known for each name on one line; `None` means "assigned, type unknown".
pub type LineTypes = HashMap<String, Option<String>>;

/// One declaration: `varname` has `type_expression` from `line_from`
/// through `line_to` (the end of its scope).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRecord {
    pub varname: String,
    pub type_expression: Option<String>,
    pub line_from: u32,
    pub line_to: u32,
}

/// A lexical region (module or function body) with its own type records
/// and the scopes nested inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub line_start: u32,
    pub line_end: u32,
    pub children: Vec<Scope>,
    pub records: Vec<TypeRecord>,
}

impl Scope {
    pub fn new(line_start: u32, line_end: u32) -> Self {
        Scope {
            line_start,
            line_end,
            children: vec![],
            records: vec![],
        }
    }

    /// Records a declaration. Without a `line`, the record starts at the
    /// scope's first line (parameters are known for the whole body).
    pub fn add_type(&mut self, varname: &str, type_expression: Option<String>, line: Option<u32>) {
        self.records.push(TypeRecord {
            varname: varname.to_string(),
            type_expression,
            line_from: line.unwrap_or(self.line_start),
            line_to: self.line_end,
        });
    }

    /// This scope's own line map, ignoring children.
    ///
    /// Annotated records overwrite earlier entries; unannotated records
    /// only fill empty slots, so a plain reassignment keeps a declared type.
    pub fn own_types(&self) -> Vec<LineTypes> {
        let mut lines = vec![LineTypes::new(); self.len()];

        for record in &self.records {
            let from = record.line_from.max(self.line_start);
            let to = record.line_to.min(self.line_end);
            for line in from..=to {
                let slot = &mut lines[(line - self.line_start) as usize];
                match &record.type_expression {
                    Some(type_expression) => {
                        slot.insert(record.varname.clone(), Some(type_expression.clone()));
                    }
                    None => {
                        slot.entry(record.varname.clone()).or_insert(None);
                    }
                }
            }
        }

        lines
    }

    /// Number of lines covered; zero for the root scope of an empty file.
    pub fn len(&self) -> usize {
        if self.line_end < self.line_start {
            0
        } else {
            (self.line_end - self.line_start + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, other: &Scope) -> bool {
        self.line_start <= other.line_start && other.line_end <= self.line_end
    }
}

/// The chain of open scopes during a traversal; the first entry is the
/// module scope.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new(root: Scope) -> Self {
        ScopeStack {
            scopes: vec![root],
        }
    }

    pub fn push(&mut self, line_start: u32, line_end: u32) {
        self.scopes.push(Scope::new(line_start, line_end));
    }

    /// Closes the innermost scope and hands it to its parent.
    /// The module scope is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            if let Some(scope) = self.scopes.pop() {
                self.current().children.push(scope);
            }
        }
    }

    pub fn current(&mut self) -> &mut Scope {
        let index = self.scopes.len() - 1;
        &mut self.scopes[index]
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Closes every open scope and returns the module scope.
    pub fn finish(mut self) -> Scope {
        while self.scopes.len() > 1 {
            self.pop();
        }
        self.scopes.remove(0)
    }
}
