/// Assignment management routes.
pub(crate) mod assignments;

/// Sign up, log in and log out routes.
pub(crate) mod auth;

/// Class management and enrollment routes.
pub(crate) mod classes;

/// Course catalogue routes.
pub(crate) mod courses;

/// Class material routes.
pub(crate) mod materials;

/// Submission and grading routes.
pub(crate) mod submissions;
