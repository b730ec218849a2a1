//! Owner kinds for uploaded images.

use std::fmt;

/// Entity an image is attached to; also the storage sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    User,
    Group,
    Product,
    Shop,
}

impl ImageKind {
    pub fn dir(&self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Group => "groups",
            Self::Product => "products",
            Self::Shop => "shops",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir())
    }
}
