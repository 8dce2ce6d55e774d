use woothee::parser::Parser;

/// Coarse device class derived from a user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
    Bot,
    Unknown,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Bot => "bot",
            DeviceType::Unknown => "unknown",
        }
    }
}

pub struct DeviceDetector {
    parser: Parser,
}

impl Default for DeviceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDetector {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn detect(&self, ua: &str) -> DeviceType {
        if ua.is_empty() || ua == "-" {
            return DeviceType::Unknown;
        }

        let Some(result) = self.parser.parse(ua) else {
            return DeviceType::Unknown;
        };

        match result.category {
            "pc" => DeviceType::Desktop,
            "smartphone" | "mobilephone" => DeviceType::Mobile,
            "tablet" => DeviceType::Tablet,
            "crawler" => DeviceType::Bot,
            _ => DeviceType::Unknown,
        }
    }
}
