//! DTOs for students_sea adapter.

/// DTO for creating a new student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentCreate {
    pub name: String,
    pub age: i32,
    pub class: Option<String>,
}

impl StudentCreate {
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            age,
            class: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// The record inserted by every seeding run.
    pub fn john_doe() -> Self {
        Self::new("John Doe", 20).with_class("Physics")
    }
}
