pub mod students_sea;
