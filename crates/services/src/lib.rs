#![forbid(unsafe_code)]

pub mod app_services;
pub mod assignment_service;
pub mod completion_service;
pub mod course_service;
pub mod error;
pub mod identity;
pub mod profile_service;
pub mod progress;
pub mod quiz_service;

pub use edu_core::Clock;

pub use app_services::AppServices;
pub use assignment_service::{AssignmentService, NewAssignment};
pub use completion_service::{CompletionReceipt, CompletionRequest, CompletionService};
pub use course_service::{
    CourseService, CourseUpdate, NewCourse, NewModule, NewQuestion, NewQuiz,
};
pub use error::{
    AppServicesError, AssignmentServiceError, CompletionError, CourseServiceError, ProfileServiceError,
    ProgressError, QuizServiceError,
};
pub use identity::SessionIdentity;
pub use profile_service::ProfileService;
pub use progress::{CompletedCourse, CourseAverage, ProgressService, TrendPoint};
pub use quiz_service::{QuizResult, QuizService, QuizSubmission};
