/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

impl Time {
    pub fn offset(self, seconds: f64) -> Time {
        Time(self.0 + seconds)
    }
}
