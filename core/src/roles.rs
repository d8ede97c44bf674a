//! Recognised Workbench partitions
//!
//! Each role is one Workbench generation: the device name the installer gives
//! its partition and the exec `SoftVer` of the Kickstart that should boot it.
//! The names are an operator contract; a partition called anything else is
//! never looked at.

use crate::bstr::BStr;

/// Upper bound on roles in one table (sizes the candidate slots)
pub const MAX_ROLES: usize = 8;

/// One Workbench generation
#[derive(Debug, Clone, Copy)]
pub struct Role {
    /// Short identifier, unique within a table ("1.3", "3.1.4", ...)
    pub id: &'static str,
    /// Expected device name, compared case-insensitively
    pub name: BStr<'static>,
    /// Kickstart version that keeps this partition bootable
    pub kick_version: u16,
}

impl Role {
    pub const fn new(id: &'static str, name: &'static [u8], kick_version: u16) -> Self {
        Self {
            id,
            name: BStr::literal(name),
            kick_version,
        }
    }
}

/// Validated, ordered role table
///
/// Order matters: when a device name matches more than one role, the earlier
/// role wins.
#[derive(Debug, Clone, Copy)]
pub struct RoleTable {
    roles: &'static [Role],
}

impl RoleTable {
    /// Build a table
    ///
    /// # Panics
    /// If the table is empty, holds more than [`MAX_ROLES`] roles, or repeats a
    /// role id. Used in a `const` item these are compile errors.
    pub const fn new(roles: &'static [Role]) -> Self {
        assert!(!roles.is_empty(), "role table is empty");
        assert!(roles.len() <= MAX_ROLES, "role table exceeds MAX_ROLES");

        let mut i = 0;
        while i < roles.len() {
            let mut j = i + 1;
            while j < roles.len() {
                assert!(!str_eq(roles[i].id, roles[j].id), "duplicate role id");
                j += 1;
            }
            i += 1;
        }

        Self { roles }
    }

    pub const fn len(&self) -> usize {
        self.roles.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Role> {
        self.roles.get(index)
    }

    pub fn iter(&self) -> core::slice::Iter<'static, Role> {
        self.roles.iter()
    }

    /// Index of the first role whose name matches `name`
    pub fn classify(&self, name: &BStr<'_>) -> Option<usize> {
        self.roles.iter().position(|role| role.name.eq_ignore_case(name))
    }
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const WORKBENCH_ROLES: [Role; 6] = [
    Role::new("1.3", b"\x06WB_1.3", 34),
    Role::new("2.x", b"\x06WB_2.X", 36),
    Role::new("3.0", b"\x06WB_3.0", 39),
    Role::new("3.1", b"\x06WB_3.1", 40),
    Role::new("3.1.4", b"\x08WB_3.1.4", 46),
    Role::new("3.2", b"\x06WB_3.2", 47),
];

const CLASSIC_ROLES: [Role; 2] = [
    Role::new("1.3", b"\x06WB_1.3", 34),
    Role::new("2.x", b"\x06WB_2.X", 36),
];

/// Every Workbench generation the module knows about
pub const WORKBENCH: RoleTable = RoleTable::new(&WORKBENCH_ROLES);

/// First-generation layout: one 1.3 and one 2.x partition
pub const CLASSIC_PAIR: RoleTable = RoleTable::new(&CLASSIC_ROLES);

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &[u8]) -> BStr<'_> {
        BStr::from_prefixed(raw).unwrap()
    }

    #[test]
    fn test_workbench_table_order() {
        let ids: Vec<_> = WORKBENCH.iter().map(|r| r.id).collect();
        assert_eq!(ids, ["1.3", "2.x", "3.0", "3.1", "3.1.4", "3.2"]);

        let versions: Vec<_> = WORKBENCH.iter().map(|r| r.kick_version).collect();
        assert_eq!(versions, [34, 36, 39, 40, 46, 47]);
    }

    #[test]
    fn test_workbench_names() {
        assert_eq!(WORKBENCH.get(4).unwrap().name.as_bytes(), b"WB_3.1.4");
        assert_eq!(WORKBENCH.get(1).unwrap().name.as_bytes(), b"WB_2.X");
        assert!(WORKBENCH.get(6).is_none());
    }

    #[test]
    fn test_classic_pair_is_prefix_of_workbench() {
        assert_eq!(CLASSIC_PAIR.len(), 2);
        for (classic, full) in CLASSIC_PAIR.iter().zip(WORKBENCH.iter()) {
            assert_eq!(classic.id, full.id);
            assert_eq!(classic.kick_version, full.kick_version);
            assert!(classic.name.eq_ignore_case(&full.name));
        }
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(WORKBENCH.classify(&name(b"\x06wb_1.3")), Some(0));
        assert_eq!(WORKBENCH.classify(&name(b"\x06Wb_2.x")), Some(1));
        assert_eq!(WORKBENCH.classify(&name(b"\x08wb_3.1.4")), Some(4));
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(WORKBENCH.classify(&name(b"\x0cOTHER_VOLUME")), None);
        assert_eq!(WORKBENCH.classify(&name(b"\x03DH0")), None);
        // 3.2 is not in the classic table
        assert_eq!(CLASSIC_PAIR.classify(&name(b"\x06WB_3.2")), None);
    }

    #[test]
    fn test_classify_first_role_wins() {
        static SHARED: [Role; 2] = [
            Role::new("a", b"\x04WORK", 39),
            Role::new("b", b"\x04work", 40),
        ];
        let table = RoleTable::new(&SHARED);
        assert_eq!(table.classify(&name(b"\x04Work")), Some(0));
    }

    #[test]
    #[should_panic(expected = "duplicate role id")]
    fn test_duplicate_id_rejected() {
        static DUP: [Role; 2] = [
            Role::new("3.1", b"\x06WB_3.1", 40),
            Role::new("3.1", b"\x06WB_3.X", 40),
        ];
        let _ = RoleTable::new(&DUP);
    }

    #[test]
    #[should_panic(expected = "role table is empty")]
    fn test_empty_table_rejected() {
        let _ = RoleTable::new(&[]);
    }

    #[test]
    #[should_panic(expected = "exceeds MAX_ROLES")]
    fn test_oversized_table_rejected() {
        static BIG: [Role; MAX_ROLES + 1] = [
            Role::new("0", b"\x010", 30),
            Role::new("1", b"\x011", 31),
            Role::new("2", b"\x012", 32),
            Role::new("3", b"\x013", 33),
            Role::new("4", b"\x014", 34),
            Role::new("5", b"\x015", 35),
            Role::new("6", b"\x016", 36),
            Role::new("7", b"\x017", 37),
            Role::new("8", b"\x018", 38),
        ];
        let _ = RoleTable::new(&BIG);
    }
}
