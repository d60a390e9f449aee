//! Booklet page ordering for duplex printing of scores.

/// Permutation, in `OrderPages` form, that reorders a document for 2-up
/// booklet printing: last, first, second, second-to-last, and so on, so that
/// folding the printed stack in half reads in page order.
///
/// Counts that are not a multiple of four are padded conceptually; pad
/// positions fall outside the document and are omitted, so the result is
/// always a permutation of `0..page_count`. Inserting the blank filler
/// sheets that true signature printing needs is the print layer's job.
pub fn booklet_page_order(page_count: usize) -> Vec<usize> {
    if page_count == 0 {
        return Vec::new();
    }
    let padded = page_count.div_ceil(4) * 4;
    let mut order = Vec::with_capacity(padded);
    let mut front = 0;
    let mut back = padded - 1;
    while front < back {
        order.push(back);
        order.push(front);
        order.push(front + 1);
        order.push(back - 1);
        front += 2;
        back -= 2;
    }
    order.retain(|&index| index < page_count);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn four_pages_fold_into_one_sheet() {
        assert_eq!(booklet_page_order(4), vec![3, 0, 1, 2]);
    }

    #[test]
    fn eight_pages_fold_into_two_sheets() {
        assert_eq!(booklet_page_order(8), vec![7, 0, 1, 6, 5, 2, 3, 4]);
    }

    #[test]
    fn non_multiple_of_four_omits_pad_positions() {
        assert_eq!(booklet_page_order(6), vec![0, 1, 5, 2, 3, 4]);
    }

    #[test]
    fn degenerate_counts() {
        assert_eq!(booklet_page_order(0), Vec::<usize>::new());
        assert_eq!(booklet_page_order(1), vec![0]);
    }

    #[test]
    fn always_a_permutation() {
        for page_count in 0..=40 {
            let mut order = booklet_page_order(page_count);
            order.sort_unstable();
            assert_eq!(order, (0..page_count).collect::<Vec<_>>());
        }
    }
}
