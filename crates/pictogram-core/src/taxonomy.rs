//! Label factors recorded for every photographed pictogram.
//!
//! Each factor is a closed set of string tags. The tags are the ones used in
//! the photo manifests, so serde and `FromStr` both accept exactly those
//! strings and reject anything else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tag that does not belong to the factor it was parsed as.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {factor} tag {value:?}")]
pub struct TagParseError {
    pub factor: &'static str,
    pub value: String,
}

macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $factor:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Manifest tag for this value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TagParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    other => Err(TagParseError {
                        factor: $factor,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

tag_enum! {
    /// Treatment of everything outside the pictogram quadrilateral.
    Surrounding as "surrounding" {
        /// Independent uniform noise per pixel and channel.
        GeneratedNoise => "noise",
        /// Solid black.
        Black => "black",
        /// Background taken from a different photograph.
        MismatchBackground => "misback",
        /// The photograph as it was taken.
        PictureBackground => "background",
    }
}

tag_enum! {
    /// Reflection source present when the photo was taken. Recorded, never synthesized.
    Glare as "glare" {
        /// Ambient light off the paper only.
        Paper => "paper",
        PlasticSleeve => "plastic",
        /// Scratched plexiglass cover.
        PlexiglassCover => "plexi",
        /// Flashlight reflected off the plexiglass cover.
        FlashlightPlexiglass => "flashlight",
    }
}

tag_enum! {
    /// Ambient light level.
    Lighting as "lighting" {
        None => "none",
        Poor => "poor",
        Good => "good",
    }
}

tag_enum! {
    PrintQuality as "print" {
        /// Saturated print.
        Good => "good",
        /// Faded print.
        Bad => "bad",
    }
}

tag_enum! {
    /// Pictogram orientation; the classification target.
    PictogramKind as "type" {
        Left => "left",
        Center => "center",
        Right => "right",
    }
}

tag_enum! {
    /// Camera shake.
    Blur as "blur" {
        None => "none",
        Blurred => "blur",
    }
}

tag_enum! {
    /// Ball placed next to the pictogram, if any.
    Balls as "balls" {
        None => "none",
        Blue => "blue",
        Red => "red",
    }
}

/// Camera pose relative to the pictogram at capture time.
///
/// Informational only; nothing in the pipeline re-projects with it.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Perspective {
    /// Rotation about (X, Y, Z).
    pub rotation: [f64; 3],
    pub translation: [f64; 3],
}
