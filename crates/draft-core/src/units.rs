//! 显示单位换算
//!
//! 内部坐标始终使用基准单位（毫米），单位只影响界面上显示和输入的数值。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 显示单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Mm,
    Cm,
    M,
}

impl Unit {
    /// 每个显示单位对应的基准单位数
    pub fn factor(&self) -> f64 {
        match self {
            Unit::Mm => 1.0,
            Unit::Cm => 10.0,
            Unit::M => 1000.0,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::M => "m",
        }
    }

    /// 基准单位 → 显示值
    pub fn to_display(&self, value: f64) -> f64 {
        value / self.factor()
    }

    /// 显示值 → 基准单位
    pub fn from_display(&self, value: f64) -> f64 {
        value * self.factor()
    }

    /// 带单位后缀的格式化
    pub fn format(&self, value: f64, decimals: usize) -> String {
        format!("{:.*} {}", decimals, self.to_display(value), self.suffix())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" => Ok(Unit::Mm),
            "cm" => Ok(Unit::Cm),
            "m" => Ok(Unit::M),
            other => Err(format!("unknown unit: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion() {
        assert_eq!(Unit::Cm.to_display(250.0), 25.0);
        assert_eq!(Unit::M.from_display(1.5), 1500.0);
        assert_eq!(Unit::Mm.to_display(3.0), 3.0);
        assert_eq!(Unit::Cm.format(125.0, 2), "12.50 cm");
    }

    #[test]
    fn test_parse() {
        assert_eq!("CM".parse::<Unit>(), Ok(Unit::Cm));
        assert!("ft".parse::<Unit>().is_err());
    }
}
