/// 根据后缀的字典序构建 BWT。
/// `order` 为按字典序排列的后缀起点（后缀树叶子的 DFS 序），起点为 0 时回绕到文本末字符。
pub fn build_bwt(text: &[u8], order: &[usize]) -> Vec<u8> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    let mut bwt = Vec::with_capacity(order.len());
    for &i in order {
        let prev = if i == 0 { text[n - 1] } else { text[i - 1] };
        bwt.push(prev);
    }
    bwt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_order(text: &[u8]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..text.len()).collect();
        order.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
        order
    }

    #[test]
    fn textbook_examples() {
        for (text, expected) in [
            (&b"banana$"[..], &b"annb$aa"[..]),
            (b"mississippi$", b"ipssm$pissii"),
            (b"abracadabra$", b"ard$rcaaaabb"),
        ] {
            assert_eq!(build_bwt(text, &naive_order(text)), expected);
        }
    }

    #[test]
    fn empty_text() {
        assert!(build_bwt(b"", &[]).is_empty());
    }
}
