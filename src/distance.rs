/// Levenshtein distance between `a` and `b`, counted in chars.
///
/// Quadratic in the input lengths. Callers only apply it to single tokens.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // One row of the (|b|+1) x (|a|+1) table at a time.
    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr = vec![0; a.len() + 1];
    for (i, bc) in b.iter().enumerate() {
        curr[0] = i + 1;
        for (j, ac) in a.iter().enumerate() {
            curr[j + 1] = if ac == bc {
                prev[j]
            } else {
                1 + prev[j].min(curr[j]).min(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[a.len()]
}
