use std::fmt;

/// Role of a tableau column. Column index is the identity of a variable during a solve;
/// the kind says what that variable stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VarKind {
    Objective,
    Decision,
    Slack,
    Surplus,
    Artificial,
    Rhs,
}

impl Default for VarKind {
    fn default() -> Self {
        VarKind::Decision
    }
}

impl VarKind {
    fn prefix(&self) -> &'static str {
        match self {
            VarKind::Objective => "Z",
            VarKind::Decision => "x",
            VarKind::Slack => "s",
            VarKind::Surplus => "e",
            VarKind::Artificial => "a",
            VarKind::Rhs => "RHS",
        }
    }

    /// Whether the column holds a variable (everything but the objective's own column and RHS).
    pub fn is_variable(&self) -> bool {
        !matches!(self, VarKind::Objective | VarKind::Rhs)
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VarKind::Objective => write!(f, "objective"),
            VarKind::Decision => write!(f, "decision"),
            VarKind::Slack => write!(f, "slack"),
            VarKind::Surplus => write!(f, "surplus"),
            VarKind::Artificial => write!(f, "artificial"),
            VarKind::Rhs => write!(f, "rhs"),
        }
    }
}

/// Column header entry: display name plus structural role.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Column {
    name: String,
    kind: VarKind,
}

impl Column {
    pub fn new<T: ToString>(name: T, kind: VarKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }

    pub fn objective() -> Self {
        Self::new(VarKind::Objective.prefix(), VarKind::Objective)
    }

    pub fn rhs() -> Self {
        Self::new(VarKind::Rhs.prefix(), VarKind::Rhs)
    }

    //decision variables are numbered by position, auxiliaries by the constraint they belong to
    pub fn indexed(kind: VarKind, index: usize) -> Self {
        Self::new(format!("{}{}", kind.prefix(), index), kind)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn kind(&self) -> VarKind {
        self.kind
    }

    pub fn is_artificial(&self) -> bool {
        self.kind == VarKind::Artificial
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
