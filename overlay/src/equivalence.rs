/// A union-find structure for resolving equivalence relations on `0..n`.
#[derive(Clone, Debug)]
pub struct Equiv {
    parent: Vec<usize>,
}

impl Equiv {
    pub fn new(n: usize) -> Self {
        Equiv {
            parent: (0..n).collect(),
        }
    }

    pub fn find(&mut self, mut s: usize) -> usize {
        while self.parent[s] != s {
            self.parent[s] = self.parent[self.parent[s]];
            s = self.parent[s];
        }
        s
    }

    /// Declares `s` and `t` equivalent. The smaller root becomes the representative.
    pub fn add_equivalence(&mut self, s: usize, t: usize) {
        let (s, t) = (self.find(s), self.find(t));
        if s != t {
            let (lo, hi) = (s.min(t), s.max(t));
            self.parent[hi] = lo;
        }
    }

    /// The equivalence classes, each sorted, in order of their smallest element.
    pub fn equivalences(&mut self) -> Vec<Vec<usize>> {
        let mut class_of = vec![usize::MAX; self.parent.len()];
        let mut ret: Vec<Vec<usize>> = Vec::new();
        for s in 0..self.parent.len() {
            let root = self.find(s);
            if class_of[root] == usize::MAX {
                class_of[root] = ret.len();
                ret.push(Vec::new());
            }
            ret[class_of[root]].push(s);
        }
        ret
    }
}
