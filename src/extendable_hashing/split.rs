use crate::config::HASH_BITS;
use crate::extendable_hashing::bucket::Bucket;
use crate::extendable_hashing::IndexError;
use crate::hash::HashValueT;
use crate::utils::hashing::HashFunction;
use crate::utils::pair::Pair;
use crate::utils::{hash_bit, mask};
use log::warn;

/**
Smallest local depth above the bucket's current one at which the stored keys
and the incoming key stop sharing every hash bit, i.e. the depth the full
bucket has to be split to before the new key fits.

Fails with `OverflowBucket` when all of them agree on every bit of the hash.
*/
pub(crate) fn feasible_depth<H: HashFunction + ?Sized>(
    hash: &H,
    bucket: &Bucket,
    new_hash: HashValueT,
) -> Result<u8, IndexError> {
    let differing = bucket
        .pairs()
        .iter()
        .map(|pair| hash.get_hash(&pair.key) ^ new_hash)
        .fold(0, |acc, diff| acc | diff);
    let undecided = differing & !mask(bucket.local_depth());
    if undecided == 0 {
        warn!(
            "{} keys in bucket {} collide on all {} hash bits",
            bucket.entry_count() + 1,
            bucket.original_index(),
            HASH_BITS
        );
        return Err(IndexError::OverflowBucket {
            hash: new_hash,
            depth: bucket.local_depth(),
        });
    }
    Ok(undecided.trailing_zeros() as u8 + 1)
}

/**
Splits the full `bucket` repeatedly until `pair` fits, and inserts it.

Each round raises the local depth of the bucket holding the pairs by one and
moves the pairs whose newly significant bit is set into a new image bucket.
When every pair lands on the same side as the new key, that side is still full
and becomes the next one to split. The image buckets are returned in creation
order for the caller to publish; `bucket` keeps its identity throughout.
*/
pub(crate) fn split_chain<H: HashFunction + ?Sized>(
    hash: &H,
    bucket: &mut Bucket,
    pair: Pair,
    new_hash: HashValueT,
) -> Result<Vec<Bucket>, IndexError> {
    let mut images: Vec<Bucket> = Vec::new();
    // None while `bucket` itself is the side holding everything
    let mut holder: Option<usize> = None;
    loop {
        let splitting = side(bucket, &mut images, holder);
        if splitting.local_depth() as u32 >= HASH_BITS {
            return Err(IndexError::OverflowBucket {
                hash: new_hash,
                depth: splitting.local_depth(),
            });
        }
        let image = splitting.split(hash);
        let bit = image.local_depth() - 1;
        images.push(image);

        let next = if hash_bit(new_hash, bit) {
            Some(images.len() - 1)
        } else {
            holder
        };
        let target = side(bucket, &mut images, next);
        if !target.is_full() {
            target.insert_next(pair)?;
            return Ok(images);
        }
        holder = next;
    }
}

fn side<'a>(bucket: &'a mut Bucket, images: &'a mut [Bucket], holder: Option<usize>) -> &'a mut Bucket {
    match holder {
        Some(image) => &mut images[image],
        None => bucket,
    }
}
