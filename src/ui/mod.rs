/// UI panels
///
/// - `browser.rs` - image browser with magnifier
/// - `import.rs` - CSV review before committing to the roster
/// - `search.rs` - roster search and nicknames
/// - `table.rs` - shared table layout

pub mod browser;
pub mod import;
pub mod search;
pub mod table;
