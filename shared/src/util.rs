/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Short, upper-cased reference for a long identifier (last six characters).
///
/// Used on confirmation screens and receipts: `"order-1f3a...c0ffee"` → `"C0FFEE"`.
pub fn short_reference(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    let start = chars.len().saturating_sub(6);
    chars[start..].iter().collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_reference() {
        assert_eq!(short_reference("booking-abcdef123456"), "123456");
        assert_eq!(short_reference("ab"), "AB");
        assert_eq!(short_reference(""), "");
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2024-01-01 00:00:00 UTC
        assert!(now_millis() > 1_704_067_200_000);
    }
}
