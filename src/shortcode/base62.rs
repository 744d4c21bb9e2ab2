/// 数字、大写、小写
pub const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// 完整的 base-62 表示（高位在前）
pub fn encode_base62(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::with_capacity(22);
    while n > 0 {
        out.push(BASE62_ALPHABET[(n % 62) as usize]);
        n /= 62;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// 取最低 `len` 位 base-62 数字（不足补 0），高位在前
///
/// 低位在 2^128 上近似均匀分布，高位不是。
pub fn truncate_base62(mut n: u128, len: usize) -> String {
    let mut out = vec![b'0'; len];
    for slot in out.iter_mut().rev() {
        *slot = BASE62_ALPHABET[(n % 62) as usize];
        n /= 62;
    }
    out.into_iter().map(char::from).collect()
}

pub fn is_base62(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
}
