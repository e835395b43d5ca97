pub(crate) mod blur;
pub(crate) mod canvas;
pub(crate) mod composite;
pub(crate) mod encode;
pub(crate) mod provider;
pub(crate) mod surface;
