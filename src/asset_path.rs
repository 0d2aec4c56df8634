//! Project-relative asset path type with validation.

use crate::{Error, Result};
use std::borrow::Borrow;
use std::fmt;

/// Maximum length for asset paths (in bytes).
const MAX_PATH_LENGTH: usize = 32768;

/// File extensions (lowercase) treated as raster images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// A validated project path such as `Assets/Textures/Grass.png`.
///
/// [`AssetPath::new`] ensures that:
/// - No NUL bytes or backslashes are present (paths are `/`-separated)
/// - The path is not absolute (does not start with `/`)
/// - No empty segments exist (no `//` or trailing `/`)
/// - No `.` or `..` segments are present
///
/// Paths read from a package skip these checks so that assets written by
/// other tools are kept as they are.
///
/// # Examples
///
/// ```
/// use unipkg::AssetPath;
///
/// let path = AssetPath::new("Assets/Scripts/Player.cs").unwrap();
/// assert_eq!(path.file_name(), "Player.cs");
/// assert_eq!(path.extension(), Some("cs"));
///
/// assert!(AssetPath::new("../outside.txt").is_err());
/// assert!(AssetPath::new("Assets\\Windows.txt").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetPath(String);

impl AssetPath {
    /// Creates a new `AssetPath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAssetPath`] if the path is empty, too long,
    /// absolute, contains NUL bytes or backslashes, or has empty, `.` or `..`
    /// segments.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    /// Wraps a pathname read from a package, checking only that it is
    /// non-empty.
    ///
    /// Packages written by other tools may hold backslashes or `.`
    /// segments. Such assets are kept as they are so export writes them
    /// back unchanged.
    pub(crate) fn from_archive(s: &str) -> Option<Self> {
        (!s.is_empty()).then(|| Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(Error::InvalidAssetPath("empty path".into()));
        }
        if s.contains('\0') {
            return Err(Error::InvalidAssetPath("contains NUL byte".into()));
        }
        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidAssetPath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }
        if s.contains('\\') {
            return Err(Error::InvalidAssetPath(format!(
                "'{}' must use forward slashes",
                s
            )));
        }
        if s.starts_with('/') {
            return Err(Error::InvalidAssetPath(format!(
                "absolute path '{}' not allowed",
                s
            )));
        }
        if s.ends_with('/') {
            return Err(Error::InvalidAssetPath(format!(
                "trailing slash in '{}' not allowed",
                s
            )));
        }

        for segment in s.split('/') {
            match segment {
                "" => {
                    return Err(Error::InvalidAssetPath(
                        "empty segment (consecutive slashes)".into(),
                    ));
                }
                "." | ".." => {
                    return Err(Error::InvalidAssetPath(format!(
                        "'{}' segment not allowed",
                        segment
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the file extension, if any.
    ///
    /// A leading dot (e.g. `.gitignore`) does not start an extension.
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        let dot_pos = file_name.rfind('.')?;
        if dot_pos == 0 {
            None
        } else {
            Some(&file_name[dot_pos + 1..])
        }
    }

    /// Returns `true` if the extension names a raster image format.
    ///
    /// Classification is purely by extension (case-insensitive), never by
    /// content sniffing.
    pub fn is_image(&self) -> bool {
        self.extension().is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
    }
}

impl AsRef<str> for AssetPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AssetPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for AssetPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for AssetPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}
