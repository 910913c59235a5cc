mod assignment;
mod course;
mod ids;
mod profile;

pub use assignment::{Assignment, AssignmentError, AssignmentStatus};
pub use course::{Course, CourseError, Module, Question, Quiz, MIN_QUESTION_OPTIONS};
pub use ids::{CourseId, LearnerId, ParseIdError, COURSE_ID_LEN};
pub use profile::{CompletionRecord, ProfileError, Score, UserProfile};
