
#[cfg(test)]
mod corruption;


#[cfg(test)]
mod dictionary;
