//! Repeat groups
//!
//! Groups are derived data: they are rebuilt from the repeat flags of the
//! measure headers, and headers point back at their group through a
//! [`RepeatGroupId`] index into `Song::repeat_groups`.

use super::measure::MeasureHeader;

/// Index of a group in `Song::repeat_groups`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepeatGroupId(pub usize);

/// A run of measure headers bounded by repeat signs
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RepeatGroup {
    /// Member header indices, ascending
    pub headers: Vec<usize>,
    /// Headers where playback jumps back to
    pub openings: Vec<usize>,
    /// Headers carrying a repeat close
    pub closings: Vec<usize>,
    pub closed: bool,
}

impl RepeatGroup {
    fn push(&mut self, index: usize, header: &MeasureHeader) {
        if self.openings.is_empty() {
            self.openings.push(index);
        }
        self.headers.push(index);
        if header.is_repeat_close() {
            self.closings.push(index);
            self.closed = true;
        } else if self.closed {
            self.closed = false;
            self.openings.push(index);
        }
    }

    /// True when the group carries an actual repeat sign
    pub fn has_repeat(&self, headers: &[MeasureHeader]) -> bool {
        !self.closings.is_empty()
            || self
                .headers
                .iter()
                .any(|&i| headers.get(i).is_some_and(|h| h.repeat_open))
    }

    pub fn first(&self) -> Option<usize> {
        self.headers.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.headers.last().copied()
    }
}

/// Partition headers into repeat groups and set each header's back-reference
///
/// A new group starts at every repeat open, and after a closed group unless
/// the header is an alternative ending of that group.
pub fn build_repeat_groups(headers: &mut [MeasureHeader]) -> Vec<RepeatGroup> {
    let mut groups: Vec<RepeatGroup> = Vec::new();
    for index in 0..headers.len() {
        let header = &headers[index];
        let start_new = match groups.last() {
            None => true,
            Some(current) => {
                header.repeat_open || (current.closed && header.repeat_alternative == 0)
            }
        };
        if start_new {
            groups.push(RepeatGroup::default());
        }
        let id = groups.len() - 1;
        groups[id].push(index, header);
        headers[index].repeat_group = Some(RepeatGroupId(id));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(open: bool, close: u8, alternative: u8) -> MeasureHeader {
        MeasureHeader {
            repeat_open: open,
            repeat_close: close,
            repeat_alternative: alternative,
            ..Default::default()
        }
    }

    #[test]
    fn test_simple_repeat() {
        let mut headers = vec![
            header(false, 0, 0),
            header(true, 0, 0),
            header(false, 2, 0),
            header(false, 0, 0),
        ];
        let groups = build_repeat_groups(&mut headers);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].headers, vec![1, 2]);
        assert_eq!(groups[1].closings, vec![2]);
        assert!(groups[1].closed);
        assert!(groups[1].has_repeat(&headers));
        assert!(!groups[2].has_repeat(&headers));
        assert_eq!(headers[2].repeat_group, Some(RepeatGroupId(1)));
        assert_eq!(headers[3].repeat_group, Some(RepeatGroupId(2)));
    }

    #[test]
    fn test_alternative_endings_stay_in_group() {
        let mut headers = vec![
            header(true, 0, 0),
            header(false, 1, 0b01),
            header(false, 0, 0b10),
            header(false, 0, 0),
        ];
        let groups = build_repeat_groups(&mut headers);

        // the last ending never closes, so the following header stays in the group
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].headers, vec![0, 1, 2, 3]);
        assert_eq!(groups[0].openings, vec![0, 2]);
        assert!(!groups[0].closed);
        assert_eq!(headers[3].repeat_group, Some(RepeatGroupId(0)));
    }
}
