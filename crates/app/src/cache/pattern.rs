//! Glob matching for cache key patterns.
//!
//! Supports `*` (any run of characters, including none) and `?` (exactly one
//! character). Every other character matches itself.

pub(crate) fn glob_matches(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    let mut p = 0;
    let mut c = 0;
    let mut star: Option<(usize, usize)> = None;

    while c < candidate.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, c));
                p += 1;
            }
            Some(&ch) if ch == '?' || candidate.get(c) == Some(&ch) => {
                p += 1;
                c += 1;
            }
            _ => {
                let Some((star_p, star_c)) = star else {
                    return false;
                };

                p = star_p + 1;
                c = star_c + 1;
                star = Some((star_p, star_c + 1));
            }
        }
    }

    pattern.iter().skip(p).all(|ch| *ch == '*')
}
