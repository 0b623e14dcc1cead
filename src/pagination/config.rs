/// 1-indexed page request sent to list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    pub fn first(size: usize) -> Self {
        Self::new(1, size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(10)
    }
}
