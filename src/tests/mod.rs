#[cfg(test)]
pub(crate) mod common;




#[cfg(test)]
mod test_gallery;

#[cfg(test)]
mod test_bio_proxy;
