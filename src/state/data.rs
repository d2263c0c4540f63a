/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer.

/// Number of fields in one roster CSV line
pub const ROW_FIELDS: usize = 5;

/// One CSV line, held until it is committed to the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRow {
    /// Fields in file order: id, name, gender, building code, room number
    pub fields: [String; ROW_FIELDS],
}

impl LoadedRow {
    pub fn idno(&self) -> &str {
        &self.fields[0]
    }

    pub fn name(&self) -> &str {
        &self.fields[1]
    }

    pub fn gender(&self) -> &str {
        &self.fields[2]
    }

    pub fn hoscode(&self) -> &str {
        &self.fields[3]
    }

    pub fn roomno(&self) -> &str {
        &self.fields[4]
    }
}

/// A student stored in the roster database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    /// Primary key (e.g., "2021A7PS0001")
    pub idno: String,
    pub name: String,
    pub gender: String,
    /// Building (bhawan) code
    pub hoscode: String,
    pub roomno: String,
    pub nick: Option<String>,
}

/// One row of a roster search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub idno: String,
    pub name: String,
    pub hoscode: String,
    pub roomno: String,
}

/// A student that has a nickname set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nickname {
    pub name: String,
    pub idno: String,
    pub nick: String,
}
