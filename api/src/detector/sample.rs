//! Frame records as printed by the analyzer

use super::DetectError;

/// One decoded video frame: `pts_time,width,height,pix_fmt`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSample {
    /// Presentation time in seconds; `None` when the analyzer printed `N/A`
    pub timestamp: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
}

/// Geometry and pixel format every later frame is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceGeometry {
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
}

impl FrameSample {
    /// Decode one CSV record. Anything other than exactly four fields with
    /// integer dimensions is rejected.
    pub fn parse_record(line: &str) -> Result<Self, DetectError> {
        let malformed = |reason| DetectError::MalformedFrameRecord {
            line: line.to_string(),
            reason,
        };

        let fields: Vec<&str> = line.trim().split(',').collect();
        let [timestamp, width, height, pixel_format] = fields.as_slice() else {
            return Err(malformed("expected 4 comma-separated fields"));
        };

        let timestamp = match timestamp.trim() {
            "N/A" | "" => None,
            value => Some(
                value
                    .parse::<f64>()
                    .map_err(|_| malformed("timestamp is not a number"))?,
            ),
        };
        let width = width
            .trim()
            .parse()
            .map_err(|_| malformed("width is not an unsigned integer"))?;
        let height = height
            .trim()
            .parse()
            .map_err(|_| malformed("height is not an unsigned integer"))?;

        Ok(Self {
            timestamp,
            width,
            height,
            pixel_format: pixel_format.trim().to_string(),
        })
    }

    pub fn geometry(&self) -> ReferenceGeometry {
        ReferenceGeometry {
            width: self.width,
            height: self.height,
            pixel_format: self.pixel_format.clone(),
        }
    }

    pub fn matches(&self, reference: &ReferenceGeometry) -> bool {
        self.width == reference.width
            && self.height == reference.height
            && self.pixel_format == reference.pixel_format
    }
}
