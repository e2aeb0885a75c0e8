#[inline(always)]
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Index of the first maximum, `None` for an empty slice.
#[inline(always)]
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match best {
            Some(b) if *v <= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Indices of every value equal to the maximum.
pub fn argmax_all(values: &[f64]) -> Vec<usize> {
    let best = max(values);
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == best)
        .map(|(i, _)| i)
        .collect()
}

pub fn moving_average(window: usize, vector: &[f64]) -> Vec<f64> {
    let window = window.max(1);
    let mut aux: usize = 0;
    let mut result: Vec<f64> = vec![];
    while aux < vector.len() {
        let end: usize = (aux + window).min(vector.len());
        let slice: &[f64] = &vector[aux..end];
        let r: f64 = slice.iter().sum();
        result.push(r / slice.len() as f64);
        aux = end;
    }
    result
}
