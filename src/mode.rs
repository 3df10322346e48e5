//! `ls -l` style rendering of `st_mode`.

const S_IFMT: u32 = 0o170000;
const S_IFSOCK: u32 = 0o140000;
const S_IFLNK: u32 = 0o120000;
const S_IFREG: u32 = 0o100000;
const S_IFBLK: u32 = 0o060000;
const S_IFDIR: u32 = 0o040000;
const S_IFCHR: u32 = 0o020000;
const S_IFIFO: u32 = 0o010000;

const S_ISUID: u32 = 0o4000;
const S_ISGID: u32 = 0o2000;
const S_ISVTX: u32 = 0o1000;

/// Renders type and permission bits as ten characters, e.g. `drwxr-xr-x` or `-rwsr-xr-x`.
pub fn permission_string(mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(match mode & S_IFMT {
        S_IFREG => '-',
        S_IFDIR => 'd',
        S_IFLNK => 'l',
        S_IFCHR => 'c',
        S_IFBLK => 'b',
        S_IFIFO => 'p',
        S_IFSOCK => 's',
        _ => '?',
    });
    push_triplet(&mut out, mode >> 6, mode & S_ISUID != 0, 's');
    push_triplet(&mut out, mode >> 3, mode & S_ISGID != 0, 's');
    push_triplet(&mut out, mode, mode & S_ISVTX != 0, 't');
    out
}

fn push_triplet(out: &mut String, bits: u32, special: bool, special_char: char) {
    out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
    out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
    out.push(match (bits & 0o1 != 0, special) {
        (true, true) => special_char,
        (false, true) => special_char.to_ascii_uppercase(),
        (true, false) => 'x',
        (false, false) => '-',
    });
}

/// Synthesizes an `st_mode` where the platform does not expose one.
#[cfg(not(unix))]
pub(crate) fn synthetic_mode(metadata: &std::fs::Metadata) -> u32 {
    let kind = if metadata.is_dir() {
        S_IFDIR | 0o111
    } else if metadata.file_type().is_symlink() {
        S_IFLNK
    } else {
        S_IFREG
    };
    let perms = if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    };
    kind | perms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_and_directory() {
        assert_eq!(permission_string(0o100644), "-rw-r--r--");
        assert_eq!(permission_string(0o040755), "drwxr-xr-x");
        assert_eq!(permission_string(0o100000), "----------");
    }

    #[test]
    fn special_bits() {
        assert_eq!(permission_string(0o104755), "-rwsr-xr-x");
        assert_eq!(permission_string(0o102644), "-rw-r-Sr--");
        assert_eq!(permission_string(0o041777), "drwxrwxrwt");
        assert_eq!(permission_string(0o041776), "drwxrwxrwT");
    }

    #[test]
    fn other_types() {
        assert_eq!(permission_string(0o120777), "lrwxrwxrwx");
        assert_eq!(permission_string(0o020620), "crw--w----");
        assert_eq!(permission_string(0o060660), "brw-rw----");
        assert_eq!(permission_string(0o010644), "prw-r--r--");
        assert_eq!(permission_string(0o140755), "srwxr-xr-x");
    }
}
