use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// India Standard Time, +05:30.
pub const IST_OFFSET_MINUTES: i32 = 330;

/// Branding and regional settings printed on every bill.
///
/// Loaded from JSON; any field left out takes the default, so a
/// profile file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopProfile {
    pub name: String,
    pub tagline: String,
    pub address: String,
    pub phone: String,
    /// Label printed before amounts. The built-in PDF fonts cannot
    /// draw the rupee sign, so the default is spelled out.
    pub currency: String,
    /// Fixed offset used for every displayed date and time, regardless
    /// of the host's timezone.
    pub utc_offset_minutes: i32,
    pub follow_text: String,
    pub social_handle: String,
    pub thank_you_lines: Vec<String>,
    /// PNG or JPEG printed above the shop name.
    pub logo: Option<PathBuf>,
    /// PNG or JPEG printed in the footer (e.g. a social QR code).
    pub qr_code: Option<PathBuf>,
}

impl Default for ShopProfile {
    fn default() -> Self {
        ShopProfile {
            name: "The Lilac Confectionery".to_string(),
            tagline: "Freshly Baked, Made with Love".to_string(),
            address: "Sector 11, Panchkula".to_string(),
            phone: "+91 86999 22476".to_string(),
            currency: "Rs.".to_string(),
            utc_offset_minutes: IST_OFFSET_MINUTES,
            follow_text: "Follow us for more delicious treats!".to_string(),
            social_handle: "@THELILACCONFECTIONERY".to_string(),
            thank_you_lines: vec![
                "Thank you for your purchase!".to_string(),
                "Have a sweet day!".to_string(),
            ],
            logo: None,
            qr_code: None,
        }
    }
}

impl ShopProfile {
    /// Load a profile from a JSON file. Relative image paths are
    /// resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut profile = Self::from_json(&text)?;
        if let Some(dir) = path.parent() {
            profile.logo = profile.logo.map(|p| dir.join(p));
            profile.qr_code = profile.qr_code.map(|p| dir.join(p));
        }
        Ok(profile)
    }

    pub fn from_json(text: &str) -> Result<Self, ProfileError> {
        let profile: ShopProfile = serde_json::from_str(text)?;
        profile.timezone()?;
        Ok(profile)
    }

    /// The fixed display timezone.
    pub fn timezone(&self) -> Result<FixedOffset, ProfileError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ProfileError::Offset(self.utc_offset_minutes))
    }

    /// Display timezone, falling back to IST for an out-of-range offset.
    pub fn timezone_or_ist(&self) -> FixedOffset {
        self.timezone().unwrap_or_else(|_| ist())
    }
}

pub(crate) fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_MINUTES * 60).expect("IST offset is in range")
}
