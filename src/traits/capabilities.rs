//! Runtime discovery of optional contracts.

use super::*;

macro_rules! capabilities {
    ($( $field:ident : $with:ident => $contract:ident ),* $(,)?) => {
        /// The optional contracts a backend implements, discovered at runtime.
        ///
        /// Backends return one from [`Fs::capabilities`], listing each
        /// contract they implement:
        ///
        /// ```rust
        /// # use capfs::{Capabilities, Context, FileRead, FileWrite, Fs, FsCreate, FsError};
        /// struct Sink;
        ///
        /// impl Fs for Sink {
        ///     fn open(&self, _: &Context, name: &str) -> Result<Box<dyn FileRead>, FsError> {
        ///         Err(FsError::not_found("open", name))
        ///     }
        ///
        ///     fn capabilities(&self) -> Capabilities<'_> {
        ///         Capabilities::new().with_create(self)
        ///     }
        /// }
        ///
        /// impl FsCreate for Sink {
        ///     fn create(&self, _: &Context, _: &str) -> Result<Box<dyn FileWrite>, FsError> {
        ///         Ok(Box::new(std::io::sink()))
        ///     }
        /// }
        ///
        /// let sink = Sink;
        /// let caps = sink.capabilities();
        /// assert!(caps.create().is_some());
        /// assert!(caps.stat().is_none());
        /// ```
        #[derive(Clone, Copy, Default)]
        pub struct Capabilities<'a> {
            $( $field: Option<&'a dyn $contract>, )*
        }

        impl<'a> Capabilities<'a> {
            /// No optional contracts.
            pub fn new() -> Self {
                Self::default()
            }

            $(
                #[doc = concat!("Advertise [`", stringify!($contract), "`].")]
                pub fn $with(mut self, contract: &'a dyn $contract) -> Self {
                    self.$field = Some(contract);
                    self
                }

                #[doc = concat!("The [`", stringify!($contract), "`] implementation, if advertised.")]
                pub fn $field(&self) -> Option<&'a dyn $contract> {
                    self.$field
                }
            )*

            /// Names of the advertised contracts.
            pub fn names(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$field.is_some() {
                        names.push(stringify!($field));
                    }
                )*
                names
            }
        }
    };
}

capabilities! {
    stat: with_stat => FsStat,
    close: with_close => FsClose,
    create: with_create => FsCreate,
    append: with_append => FsAppend,
    truncate: with_truncate => FsTruncate,
    remove: with_remove => FsRemove,
    remove_all: with_remove_all => FsRemoveAll,
    rename: with_rename => FsRename,
    read_dir: with_read_dir => FsReadDir,
    walk: with_walk => FsWalk,
    mkdir: with_mkdir => FsMkdir,
    mkdir_all: with_mkdir_all => FsMkdirAll,
    symlink: with_symlink => FsSymlink,
    readlink: with_readlink => FsReadlink,
    chmod: with_chmod => FsChmod,
    chown: with_chown => FsChown,
    chtimes: with_chtimes => FsChtimes,
    abs: with_abs => FsAbs,
    rel: with_rel => FsRel,
    localize: with_localize => FsLocalize,
    glob: with_glob => FsGlob,
    dir_read: with_dir_read => FsDirRead,
    dir_append: with_dir_append => FsDirAppend,
    dir_truncate: with_dir_truncate => FsDirTruncate,
    temp_file: with_temp_file => FsTempFile,
    temp_dir: with_temp_dir => FsTempDir,
}

impl std::fmt::Debug for Capabilities<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
