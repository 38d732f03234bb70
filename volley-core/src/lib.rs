pub mod format;
pub mod stats;
pub mod validation;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use validation::ValidationResult;

pub const MIN_PLAYER_AGE: i32 = 16;
pub const MAX_PLAYER_AGE: i32 = 45;
pub const MIN_HEIGHT_CM: f64 = 140.0;
pub const MAX_HEIGHT_CM: f64 = 220.0;
pub const MIN_WEIGHT_KG: f64 = 40.0;
pub const MAX_WEIGHT_KG: f64 = 150.0;
pub const MIN_JERSEY_NUMBER: u8 = 1;
pub const MAX_JERSEY_NUMBER: u8 = 99;
pub const MIN_TEAM_SIZE: usize = 6;
pub const MAX_TEAM_SIZE: usize = 15;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 50;
pub const SETS_TO_WIN_MATCH: u8 = 3;
pub const MAX_SETS_PER_MATCH: u8 = 5;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                $name(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.as_hyphenated())
            }
        }
    };
}

id_type!(UserId);
id_type!(PlayerId);
id_type!(TeamId);
id_type!(TournamentId);
id_type!(MatchId);
id_type!(ApplicationId);
id_type!(DivisionId);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a wire-level enum that serializes as its SCREAMING_SNAKE_CASE key.
macro_rules! wire_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $key:literal),+ $(,)? }) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum!(UserRole, "user role", {
    SuperAdmin => "SUPER_ADMIN",
    Admin => "ADMIN",
    Coach => "COACH",
    AssistantCoach => "ASSISTANT_COACH",
    Player => "PLAYER",
    Member => "MEMBER",
});

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin | UserRole::Admin)
    }

    pub fn is_coach(&self) -> bool {
        matches!(self, UserRole::Coach | UserRole::AssistantCoach)
    }

    /// Admins and coaches may manage rosters.
    pub fn can_manage_team(&self) -> bool {
        self.is_admin() || self.is_coach()
    }
}

wire_enum!(PlayerPosition, "player position", {
    Setter => "SETTER",
    OutsideHitter => "OUTSIDE_HITTER",
    OppositeHitter => "OPPOSITE_HITTER",
    MiddleBlocker => "MIDDLE_BLOCKER",
    Libero => "LIBERO",
    DefensiveSpecialist => "DEFENSIVE_SPECIALIST",
});

wire_enum!(SkillLevel, "skill level", {
    Beginner => "BEGINNER",
    Intermediate => "INTERMEDIATE",
    Advanced => "ADVANCED",
    Professional => "PROFESSIONAL",
});

wire_enum!(PlayerStatus, "player status", {
    Active => "ACTIVE",
    Injured => "INJURED",
    Suspended => "SUSPENDED",
    Retired => "RETIRED",
    Inactive => "INACTIVE",
});

impl PlayerStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, PlayerStatus::Active)
    }
}

wire_enum!(Gender, "gender", {
    Male => "MALE",
    Female => "FEMALE",
    Other => "OTHER",
});

wire_enum!(ApplicationStatus, "application status", {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
});

impl ApplicationStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (
                ApplicationStatus::Pending,
                ApplicationStatus::Approved | ApplicationStatus::Rejected
            )
        )
    }
}

wire_enum!(TournamentStatus, "tournament status", {
    Upcoming => "UPCOMING",
    RegistrationOpen => "REGISTRATION_OPEN",
    Ongoing => "ONGOING",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

wire_enum!(MatchStatus, "match status", {
    Scheduled => "SCHEDULED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
    Postponed => "POSTPONED",
});
