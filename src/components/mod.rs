pub mod goal_sheet;
pub mod league_table;
