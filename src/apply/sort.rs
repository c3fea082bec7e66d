// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Stable field-based sorting of lines.

/// Sort lines by a whitespace-delimited field.
///
/// - `None` leaves lines as they are.
/// - `Some(0)` sorts by the entire line.
/// - `Some(n)` sorts by the nth field, counting from one. Lines that are too
///   short to have that field are put first, in their original order.
///
/// Sorting is stable, so lines with equal keys keep their relative order.
pub fn sort_lines(lines: Vec<String>, sortorder: Option<usize>) -> Vec<String> {
    match sortorder {
        None => lines,
        Some(0) => {
            let mut lines = lines;
            lines.sort();
            lines
        }
        Some(nth) => {
            let (mut short, mut keyed) = (Vec::new(), Vec::new());
            for line in lines {
                match line.split_whitespace().nth(nth - 1).map(str::to_owned) {
                    Some(key) => keyed.push((key, line)),
                    None => short.push(line),
                }
            }

            keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
            short.extend(keyed.into_iter().map(|(_, line)| line));
            short
        }
    }
}
