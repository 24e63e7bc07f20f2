use serde::{Deserialize, Serialize};

pub mod attempt;
pub mod page;
pub mod question;
pub mod quiz;
pub mod user;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map($name)
            }
        }
    };
}

id_type!(
    /// Quiz primary key
    QuizId
);
id_type!(
    /// User attempt primary key
    AttemptId
);
id_type!(
    /// Question instance inside an attempt, or a bank question for admin calls
    QuestionId
);
id_type!(OptionId);
id_type!(
    /// Quiz question group primary key
    GroupId
);
id_type!(CategoryId);
id_type!(UserId);
id_type!(GradeId);
