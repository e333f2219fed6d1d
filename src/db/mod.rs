//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Learner accounts: `user/{id}`
    pub const USERS: &str = "user";
    /// Admin accounts: `admin/{id}`
    pub const ADMINS: &str = "admin";
    /// Published courses: `Courses/{courseId}`
    pub const COURSES: &str = "Courses";
    /// Authored course mirror: `admin/{id}/courses/{courseId}`
    pub const ADMIN_COURSES: &str = "courses";
    /// Text-snippet repository: `admin/{id}/Database/{entryId}`
    pub const REPOSITORY: &str = "Database";
    /// Enrollments: `user/{id}/InProgressCourses/{courseId}`
    pub const IN_PROGRESS: &str = "InProgressCourses";
    /// Roster mirror: `admin/{id}/courses/{courseId}/AppliedStudents/{userId}`
    pub const APPLIED_STUDENTS: &str = "AppliedStudents";
}
