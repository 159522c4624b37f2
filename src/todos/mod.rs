//! Todoist integration — task model and HTTP client.

pub mod client;
pub mod model;

pub use client::{TaskCreator, TodoistClient};
pub use model::{NewTask, Task};
